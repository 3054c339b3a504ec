mod health;
mod recycle_bin;
mod redirect;
mod title;

pub use health::health_handler;
pub use recycle_bin::{
    page_recycle_bin_handler, recover_recycle_bin_handler, remove_recycle_bin_handler,
    save_recycle_bin_handler,
};
pub use redirect::redirect_handler;
pub use title::title_handler;
