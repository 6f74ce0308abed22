//! `SeaORM` entity definitions.

pub mod notifications;
pub mod order_items;
pub mod orders;
pub mod partner_rebates;
pub mod partner_stocks;
pub mod partners;
pub mod rebate_rates;
pub mod royalties;
pub mod sea_orm_active_enums;
pub mod stock_movements;
pub mod users;
pub mod withdrawals;
pub mod works;
