pub mod catalog;
pub mod mask;
pub mod principals;
pub mod report;
pub mod scope;
