//! `SeaORM` entity definitions.

pub mod currencies;
pub mod currency_rates;
pub mod product_prices;
pub mod products;
pub mod sea_orm_active_enums;
