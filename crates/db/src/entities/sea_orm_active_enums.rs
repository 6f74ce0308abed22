//! `SeaORM` active enums mapped to Postgres enum types.
//!
//! JSON uses the same literals as the database.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// `user_role` enum.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "user_role")]
pub enum UserRole {
    /// Executive.
    #[sea_orm(string_value = "PDG")]
    Pdg,
    /// Author.
    #[sea_orm(string_value = "AUTEUR")]
    Auteur,
    /// Designer.
    #[sea_orm(string_value = "CONCEPTEUR")]
    Concepteur,
    /// Sales representative.
    #[sea_orm(string_value = "REPRESENTANT")]
    Representant,
    /// Partner.
    #[sea_orm(string_value = "PARTENAIRE")]
    Partenaire,
    /// Client.
    #[sea_orm(string_value = "CLIENT")]
    Client,
}

/// `royalty_type` enum.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "royalty_type")]
pub enum RoyaltyType {
    /// Percentage of the sale.
    #[sea_orm(string_value = "PERCENTAGE")]
    Percentage,
    /// Flat amount per copy.
    #[sea_orm(string_value = "FIXED")]
    Fixed,
}

/// `rebate_rate_type` enum.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "rebate_rate_type")]
pub enum RebateRateType {
    /// Per work.
    #[sea_orm(string_value = "WORK")]
    Work,
    /// Per author.
    #[sea_orm(string_value = "AUTHOR")]
    Author,
    /// Per partner.
    #[sea_orm(string_value = "PARTNER")]
    Partner,
    /// Everything.
    #[sea_orm(string_value = "GLOBAL")]
    Global,
}

/// `withdrawal_status` enum.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "withdrawal_status")]
pub enum WithdrawalStatus {
    /// Requested.
    #[sea_orm(string_value = "PENDING")]
    Pending,
    /// Approved.
    #[sea_orm(string_value = "APPROVED")]
    Approved,
    /// Paid.
    #[sea_orm(string_value = "PAID")]
    Paid,
    /// Refused.
    #[sea_orm(string_value = "REJECTED")]
    Rejected,
}

/// `withdrawal_method` enum.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "withdrawal_method")]
pub enum WithdrawalMethod {
    /// Mobile money.
    #[sea_orm(string_value = "MOMO")]
    Momo,
    /// Bank transfer.
    #[sea_orm(string_value = "BANK")]
    Bank,
    /// Cash.
    #[sea_orm(string_value = "CASH")]
    Cash,
}

/// `stock_movement_type` enum.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "stock_movement_type")]
pub enum StockMovementType {
    /// Allocation to a partner.
    #[sea_orm(string_value = "PARTNER_ALLOCATION")]
    PartnerAllocation,
    /// Sale by a partner.
    #[sea_orm(string_value = "PARTNER_SALE")]
    PartnerSale,
    /// Return to a partner.
    #[sea_orm(string_value = "PARTNER_RETURN")]
    PartnerReturn,
}
