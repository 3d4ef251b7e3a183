//! Maps wall-clock spans and column placements onto the day grid.
//!
//! Vertical position is in pixels from the top of the work window; horizontal
//! position is a percentage of the day column so the renderer can size freely.

use chrono::{NaiveDateTime, Timelike};
use serde::Serialize;

use super::algorithm::Placement;
use super::config::LayoutConfig;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VerticalSpan {
    pub top_px: f64,
    pub height_px: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HorizontalSpan {
    pub left_percent: f64,
    pub width_percent: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BlockGeometry {
    pub top_px: f64,
    pub height_px: f64,
    pub left_percent: f64,
    pub width_percent: f64,
}

/// Returns `None` when the appointment starts before the work window opens.
pub fn vertical_span(
    start: NaiveDateTime,
    end: NaiveDateTime,
    config: &LayoutConfig,
) -> Option<VerticalSpan> {
    let start_minutes = f64::from(start.time().num_seconds_from_midnight()) / 60.0;
    let window_start_minutes = f64::from(config.work_day_start_hour) * 60.0;
    let offset_minutes = start_minutes - window_start_minutes;
    if offset_minutes < 0.0 {
        return None;
    }

    let duration_minutes = (end - start).num_seconds() as f64 / 60.0;
    Some(VerticalSpan {
        top_px: offset_minutes * config.pixels_per_hour / 60.0,
        height_px: duration_minutes * config.pixels_per_hour / 60.0,
    })
}

pub fn horizontal_span(placement: Placement) -> HorizontalSpan {
    let width_percent = 100.0 / placement.total_columns.max(1) as f64;
    HorizontalSpan {
        left_percent: placement.column as f64 * width_percent,
        width_percent,
    }
}

pub fn block_geometry(
    start: NaiveDateTime,
    end: NaiveDateTime,
    placement: Placement,
    config: &LayoutConfig,
) -> Option<BlockGeometry> {
    let vertical = vertical_span(start, end, config)?;
    let horizontal = horizontal_span(placement);
    Some(BlockGeometry {
        top_px: vertical.top_px,
        height_px: vertical.height_px,
        left_percent: horizontal.left_percent,
        width_percent: horizontal.width_percent,
    })
}

pub fn grid_height_px(config: &LayoutConfig) -> f64 {
    f64::from(config.window_hours()) * config.pixels_per_hour
}

/// `(hour, top_px)` for each hour line drawn across the grid.
pub fn hour_lines(config: &LayoutConfig) -> Vec<(u32, f64)> {
    (config.work_day_start_hour..config.work_day_end_hour)
        .map(|hour| {
            let top = f64::from(hour - config.work_day_start_hour) * config.pixels_per_hour;
            (hour, top)
        })
        .collect()
}
