// Domain logic, one module per pipeline stage

pub mod drafts;
pub mod publish;
pub mod screening;
pub mod status;
