// Internal logging facade.
// Re-exports the `observability` macros under their conventional names so
// modules can write `use crate::prelude::{info, warn};`.

#[allow(unused_imports)]
pub(crate) use crate::observability::{
    log_debug as debug, log_error as error, log_info as info, log_warn as warn,
};
