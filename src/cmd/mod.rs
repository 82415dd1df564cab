//! CLI command implementations.
//!
//! | Module     | Commands handled |
//! |------------|------------------|
//! | `validate` | `Validate`       |
//! | `evaluate` | `Evaluate`       |
//! | `github`   | `Github`         |

pub mod evaluate;
pub mod github;
pub mod validate;

pub use evaluate::cmd_evaluate;
pub use github::cmd_github;
pub use validate::cmd_validate;
