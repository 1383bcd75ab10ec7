use serde::{Deserialize, Serialize};
use strum::{Display, EnumString, IntoStaticStr};

use crate::data::offer::OfferCol;

/// How a table is meant to be drawn.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString, IntoStaticStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ChartKind {
    Scatter,
    Bar,
    HorizontalBar,
}

/// Presentation-neutral description of a categorical x/y chart.
///
/// Column fields name columns of the table this chart is attached to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChartSpec {
    pub kind: ChartKind,
    pub title: String,
    pub x: OfferCol,
    pub y: OfferCol,
    /// Column whose values split the data into colored series.
    pub color: Option<OfferCol>,
}

impl ChartSpec {
    pub fn new(kind: ChartKind, title: impl Into<String>, x: OfferCol, y: OfferCol) -> Self {
        Self {
            kind,
            title: title.into(),
            x,
            y,
            color: None,
        }
    }

    pub fn with_color(self, color: OfferCol) -> Self {
        Self {
            color: Some(color),
            ..self
        }
    }
}

/// Implemented by every table that feeds a chart.
pub trait Chart {
    fn chart_spec(&self) -> ChartSpec;
}
