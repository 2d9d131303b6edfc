//! Uniform CRUD over the portfolio's typed content records. Thin by design:
//! each resource is a row type in `models::content`, a couple of queries, and
//! nothing else.

pub mod about;
pub mod contacts;
pub mod experiences;
pub mod projects;
pub mod skills;
pub mod social_links;
