//! Rule-based customer segment classification.
//!
//! RULE: rules are evaluated top to bottom and the first match wins. The
//! predicates overlap (a customer with RFM_Score 13 and R_Score 5 matches
//! two of them), so the order of `SEGMENT_RULES` is part of the contract.

use crate::types::Score;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Segment {
    #[serde(rename = "Loyal Customer")]
    LoyalCustomer,
    #[serde(rename = "Active Customer")]
    ActiveCustomer,
    #[serde(rename = "New Customers")]
    NewCustomers,
    #[serde(rename = "At Risk")]
    AtRisk,
    #[serde(rename = "Need Attention")]
    NeedAttention,
}

impl Segment {
    pub const ALL: [Segment; 5] = [
        Segment::LoyalCustomer,
        Segment::ActiveCustomer,
        Segment::NewCustomers,
        Segment::AtRisk,
        Segment::NeedAttention,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Self::LoyalCustomer  => "Loyal Customer",
            Self::ActiveCustomer => "Active Customer",
            Self::NewCustomers   => "New Customers",
            Self::AtRisk         => "At Risk",
            Self::NeedAttention  => "Need Attention",
        }
    }
}

impl fmt::Display for Segment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// The three quantile scores of one customer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RfmScores {
    pub r: Score,
    pub f: Score,
    pub m: Score,
}

impl RfmScores {
    pub fn total(&self) -> u16 {
        u16::from(self.r) + u16::from(self.f) + u16::from(self.m)
    }
}

type SegmentRule = (fn(&RfmScores) -> bool, Segment);

const SEGMENT_RULES: [SegmentRule; 4] = [
    (|s: &RfmScores| s.total() >= 12, Segment::LoyalCustomer),
    (|s: &RfmScores| s.total() >= 9,  Segment::ActiveCustomer),
    (|s: &RfmScores| s.r == 5,        Segment::NewCustomers),
    (|s: &RfmScores| s.total() <= 5,  Segment::AtRisk),
];

/// Label a customer. Falls through to "Need Attention".
pub fn classify(scores: &RfmScores) -> Segment {
    SEGMENT_RULES
        .iter()
        .find(|(applies, _)| applies(scores))
        .map_or(Segment::NeedAttention, |(_, segment)| *segment)
}
