//! Grouped bar chart of API call frequency, rendered as a standalone HTML page.
//!
//! Bars are grouped by event name (first-seen order, so the busiest event
//! comes first) and colored by principal. Each bar carries a hover tooltip
//! with the event source, user agent and principal type. The page inlines
//! its SVG and CSS; it references no external scripts or stylesheets.
//!
//! Layout is computed here; `dashboard.html` only places precomputed
//! coordinates, and minijinja auto-escapes everything it interpolates.

use std::collections::HashMap;

use chrono::{SecondsFormat, Utc};
use serde::Serialize;

use crate::error::ReportError;
use crate::render::RenderedArtifact;
use crate::rows::ApiCallRow;

pub const CHART_TITLE: &str = "Top AWS API Calls by Principal";

const TEMPLATE_NAME: &str = "dashboard.html";
const TEMPLATE: &str = include_str!("dashboard.html");

/// Plotly's default qualitative palette.
const PALETTE: [&str; 10] = [
    "#636EFA", "#EF553B", "#00CC96", "#AB63FA", "#FFA15A", "#19D3F3", "#FF6692", "#B6E880",
    "#FF97FF", "#FECB52",
];

const PLOT_HEIGHT: f64 = 420.0;
const MARGIN_LEFT: f64 = 80.0;
const MARGIN_RIGHT: f64 = 24.0;
const MARGIN_TOP: f64 = 24.0;
const MARGIN_BOTTOM: f64 = 170.0;
const BAR_WIDTH: f64 = 18.0;
const BAR_GAP: f64 = 2.0;
const GROUP_GAP: f64 = 16.0;
const MIN_PLOT_WIDTH: f64 = 600.0;
const Y_TICKS: u32 = 5;

// ── Template context ──────────────────────────────────────────

#[derive(Debug, Serialize)]
struct ChartContext<'a> {
    title: &'static str,
    generated_at: String,
    row_count: usize,
    width: f64,
    height: f64,
    plot: PlotArea,
    axis: AxisTitles,
    y_ticks: Vec<Tick>,
    groups: Vec<Group>,
    bars: Vec<Bar>,
    legend: Vec<LegendEntry>,
    rows: &'a [ApiCallRow],
}

#[derive(Debug, Clone, Copy, Serialize)]
struct PlotArea {
    left: f64,
    right: f64,
    top: f64,
    bottom: f64,
}

#[derive(Debug, Serialize)]
struct AxisTitles {
    x_title_x: f64,
    x_title_y: f64,
    y_title_x: f64,
    y_title_y: f64,
}

#[derive(Debug, Serialize)]
struct Tick {
    y: f64,
    label_x: f64,
    label_y: f64,
    label: String,
}

#[derive(Debug, Serialize)]
struct Group {
    label: String,
    label_x: f64,
    label_y: f64,
}

#[derive(Debug, Serialize)]
struct Bar {
    x: f64,
    y: f64,
    width: f64,
    height: f64,
    color: &'static str,
    tooltip: String,
}

#[derive(Debug, Serialize)]
struct LegendEntry {
    principal: String,
    color: &'static str,
}

// ── Renderer ──────────────────────────────────────────────────

/// Renders the full result set into the dashboard page.
#[derive(Debug, Default)]
pub struct ChartRenderer {
    _private: (),
}

impl ChartRenderer {
    pub fn new() -> Self {
        Self { _private: () }
    }

    /// Build a minijinja environment holding the dashboard template.
    fn build_env() -> Result<minijinja::Environment<'static>, ReportError> {
        let mut env = minijinja::Environment::new();
        env.add_filter("round", round_filter);
        env.add_template(TEMPLATE_NAME, TEMPLATE)
            .map_err(|e| ReportError::Template(e.to_string()))?;
        Ok(env)
    }

    pub fn render(&self, rows: &[ApiCallRow]) -> Result<RenderedArtifact, ReportError> {
        let ctx = layout(rows);
        let env = Self::build_env()?;
        let html = env
            .get_template(TEMPLATE_NAME)
            .and_then(|tpl| tpl.render(&ctx))
            .map_err(|e| ReportError::Template(e.to_string()))?;

        tracing::debug!(
            rows = rows.len(),
            bars = ctx.bars.len(),
            bytes = html.len(),
            "Rendered dashboard"
        );
        Ok(RenderedArtifact::html(html))
    }
}

// ── Layout ────────────────────────────────────────────────────

fn layout(rows: &[ApiCallRow]) -> ChartContext<'_> {
    // Event names in first-seen order with their rows.
    let mut group_index: HashMap<&str, usize> = HashMap::new();
    let mut grouped: Vec<(&str, Vec<&ApiCallRow>)> = Vec::new();
    for row in rows {
        let idx = *group_index.entry(row.event_name.as_str()).or_insert_with(|| {
            grouped.push((row.event_name.as_str(), Vec::new()));
            grouped.len() - 1
        });
        grouped[idx].1.push(row);
    }

    // One color per principal, first-seen order.
    let mut color_index: HashMap<&str, &'static str> = HashMap::new();
    let mut legend = Vec::new();
    for row in rows {
        if !color_index.contains_key(row.principal.as_str()) {
            let color = PALETTE[legend.len() % PALETTE.len()];
            color_index.insert(row.principal.as_str(), color);
            legend.push(LegendEntry {
                principal: row.principal.clone(),
                color,
            });
        }
    }

    let y_max = axis_max(rows.iter().map(|r| r.frequency).max().unwrap_or(0));
    let bottom = MARGIN_TOP + PLOT_HEIGHT;

    let mut bars = Vec::with_capacity(rows.len());
    let mut groups = Vec::with_capacity(grouped.len());
    let mut x = MARGIN_LEFT;
    for (label, members) in &grouped {
        let slot = members.len() as f64 * BAR_WIDTH + GROUP_GAP;
        let mut bar_x = x + GROUP_GAP / 2.0;
        for row in members {
            let height = row.frequency as f64 / y_max as f64 * PLOT_HEIGHT;
            bars.push(Bar {
                x: bar_x,
                y: bottom - height,
                width: BAR_WIDTH - BAR_GAP,
                height,
                color: color_index
                    .get(row.principal.as_str())
                    .copied()
                    .unwrap_or(PALETTE[0]),
                tooltip: tooltip(row),
            });
            bar_x += BAR_WIDTH;
        }
        groups.push(Group {
            label: label.to_string(),
            label_x: x + slot / 2.0,
            label_y: bottom + 12.0,
        });
        x += slot;
    }

    let plot_width = (x - MARGIN_LEFT).max(MIN_PLOT_WIDTH);
    let plot = PlotArea {
        left: MARGIN_LEFT,
        right: MARGIN_LEFT + plot_width,
        top: MARGIN_TOP,
        bottom,
    };

    let y_ticks = (0..=Y_TICKS)
        .map(|i| {
            let value = y_max as f64 * i as f64 / Y_TICKS as f64;
            let y = bottom - value / y_max as f64 * PLOT_HEIGHT;
            Tick {
                y,
                label_x: MARGIN_LEFT - 8.0,
                label_y: y + 4.0,
                label: tick_label(value),
            }
        })
        .collect();

    let width = MARGIN_LEFT + plot_width + MARGIN_RIGHT;
    let height = MARGIN_TOP + PLOT_HEIGHT + MARGIN_BOTTOM;

    ChartContext {
        title: CHART_TITLE,
        generated_at: Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true),
        row_count: rows.len(),
        width,
        height,
        axis: AxisTitles {
            x_title_x: MARGIN_LEFT + plot_width / 2.0,
            x_title_y: height - 12.0,
            y_title_x: 20.0,
            y_title_y: MARGIN_TOP + PLOT_HEIGHT / 2.0,
        },
        plot,
        y_ticks,
        groups,
        bars,
        legend,
        rows,
    }
}

/// Smallest 1/2/5 x 10^n value at or above `max` (at least 1). Falls back to
/// `max` itself when the next step does not fit in a `u64`.
fn axis_max(max: u64) -> u64 {
    if max == 0 {
        return 1;
    }
    let mut magnitude: u64 = 1;
    while let Some(next) = magnitude.checked_mul(10) {
        if next > max {
            break;
        }
        magnitude = next;
    }
    for step in [1u64, 2, 5, 10] {
        match step.checked_mul(magnitude) {
            Some(value) if value >= max => return value,
            Some(_) => {}
            None => break,
        }
    }
    max
}

fn tick_label(value: f64) -> String {
    if value.fract() == 0.0 {
        format!("{}", value as u64)
    } else {
        format!("{:.1}", value)
    }
}

fn tooltip(row: &ApiCallRow) -> String {
    format!(
        "eventName: {}\nfrequency: {}\nprincipal: {}\neventSource: {}\nuserAgent: {}\nprincipal_type: {}",
        row.event_name,
        row.frequency,
        row.principal,
        row.event_source,
        row.user_agent,
        row.principal_type
    )
}

/// Round a float to N decimal places.
fn round_filter(value: f64, decimals: Option<u32>) -> String {
    let n = decimals.unwrap_or(0);
    format!("{:.prec$}", value, prec = n as usize)
}
