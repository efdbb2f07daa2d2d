pub mod ace;
pub mod acl;
pub mod descriptor;
pub mod error;
pub mod guid;
pub mod header;
pub mod sid;
