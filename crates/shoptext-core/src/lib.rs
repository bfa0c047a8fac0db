pub mod app_config;
pub mod config;
pub mod ids;
pub mod schema;
pub mod shops;

pub use app_config::{AppConfig, Environment};
pub use config::{load_app_config, load_app_config_from_env, ConfigError};
pub use ids::{hash_key, package_hash_id, shop_hash_id};
pub use schema::{clamp, clamp_percent, clamp_stars, SchemaError};
pub use shops::{
    flatten_packages, is_auto_package_name, Package, Price, Shop, ShopData, AUTO_PACKAGE,
    DEFAULT_SHOP, DEFAULT_SHOP_PREFIX, DEFAULT_SLOGAN, DEFAULT_THEME, PRICE_UNPARSED, UNNAMED_SHOP,
};
