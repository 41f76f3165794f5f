//! Concrete flows shipped with the site.

pub mod promo_script;
