//! Chart rendering
//!
//! Three PNG charts are written into the renderer's graph directory under
//! fixed file names. Each run overwrites the previous images.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use chrono::{Datelike, Timelike};
use plotters::prelude::*;
use plotters::style::text_anchor::{HPos, Pos, VPos};
use tracing::debug;

use crate::error::{Error, Result};
use crate::models::{GraphFilenames, Transaction};

pub const MONTHLY_CHART_FILE: &str = "monthly_chart.png";
pub const DONUT_CHART_FILE: &str = "donut_chart.png";
pub const HEATMAP_FILE: &str = "heatmap.png";

const FONT: &str = "sans-serif";

const BAR_COLOR: RGBColor = RGBColor(0x00, 0xFF, 0x88);

// Endpoints of the heatmap's sequential green scale
const HEAT_LOW: RGBColor = RGBColor(247, 252, 245);
const HEAT_HIGH: RGBColor = RGBColor(0, 68, 27);

const WEEKDAY_ROWS: [&str; 7] = [
    "Monday",
    "Tuesday",
    "Wednesday",
    "Thursday",
    "Friday",
    "Saturday",
    "Sunday",
];

/// Transaction size ranges used by the distribution chart.
///
/// Ranges are right-inclusive: 100 is Micro, 100.01 is Small.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SizeBucket {
    Micro,
    Small,
    Medium,
    Large,
    Xl,
}

impl SizeBucket {
    pub const ALL: [SizeBucket; 5] = [
        Self::Micro,
        Self::Small,
        Self::Medium,
        Self::Large,
        Self::Xl,
    ];

    /// Bucket for an amount; non-positive amounts have none
    pub fn for_amount(amount: f64) -> Option<Self> {
        match amount {
            a if a <= 0.0 || a.is_nan() => None,
            a if a <= 100.0 => Some(Self::Micro),
            a if a <= 500.0 => Some(Self::Small),
            a if a <= 1000.0 => Some(Self::Medium),
            a if a <= 5000.0 => Some(Self::Large),
            _ => Some(Self::Xl),
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Micro => "Micro (<100)",
            Self::Small => "Small (100-500)",
            Self::Medium => "Medium (500-1000)",
            Self::Large => "Large (1000-5000)",
            Self::Xl => "XL (>5000)",
        }
    }

    fn color(&self) -> RGBColor {
        match self {
            Self::Micro => RGBColor(0x00, 0xFF, 0x88),
            Self::Small => RGBColor(0x00, 0xE6, 0x76),
            Self::Medium => RGBColor(0x00, 0xC8, 0x53),
            Self::Large => RGBColor(0x00, 0x96, 0x24),
            Self::Xl => RGBColor(0x00, 0x64, 0x00),
        }
    }

    fn index(&self) -> usize {
        match self {
            Self::Micro => 0,
            Self::Small => 1,
            Self::Medium => 2,
            Self::Large => 3,
            Self::Xl => 4,
        }
    }
}

/// Amount summed per calendar month, oldest first, keyed "YYYY-MM"
pub fn monthly_totals(transactions: &[Transaction]) -> Vec<(String, f64)> {
    let mut totals: BTreeMap<(i32, u32), f64> = BTreeMap::new();
    for tx in transactions {
        *totals.entry((tx.date.year(), tx.date.month())).or_insert(0.0) += tx.amount;
    }
    totals
        .into_iter()
        .map(|((year, month), total)| (format!("{:04}-{:02}", year, month), total))
        .collect()
}

/// Transaction counts per size bucket, in [`SizeBucket::ALL`] order
pub fn bucket_counts(transactions: &[Transaction]) -> [usize; 5] {
    let mut counts = [0; 5];
    for bucket in transactions
        .iter()
        .filter_map(|t| SizeBucket::for_amount(t.amount))
    {
        counts[bucket.index()] += 1;
    }
    counts
}

/// Transaction counts by weekday (row 0 = Monday) and hour of day
pub fn weekday_hour_counts(transactions: &[Transaction]) -> [[usize; 24]; 7] {
    let mut grid = [[0; 24]; 7];
    for tx in transactions {
        let day = tx.date.weekday().num_days_from_monday() as usize;
        grid[day][tx.date.hour() as usize] += 1;
    }
    grid
}

/// Writes chart images into a fixed directory
#[derive(Debug, Clone)]
pub struct ChartRenderer {
    graph_dir: PathBuf,
}

impl ChartRenderer {
    pub fn new(graph_dir: impl Into<PathBuf>) -> Self {
        Self {
            graph_dir: graph_dir.into(),
        }
    }

    pub fn graph_dir(&self) -> &Path {
        &self.graph_dir
    }

    /// Create the graph directory if it doesn't exist yet
    pub fn ensure_dir(&self) -> Result<()> {
        std::fs::create_dir_all(&self.graph_dir)?;
        Ok(())
    }

    /// Render all three charts. The first failure aborts the run.
    pub fn render_all(&self, transactions: &[Transaction]) -> Result<GraphFilenames> {
        Ok(GraphFilenames {
            monthly: self.render_monthly(transactions)?,
            distribution: self.render_distribution(transactions)?,
            heatmap: self.render_heatmap(transactions)?,
        })
    }

    /// Bar chart of spending per month with each bar labeled by its total
    pub fn render_monthly(&self, transactions: &[Transaction]) -> Result<String> {
        let path = self.graph_dir.join(MONTHLY_CHART_FILE);
        let totals = monthly_totals(transactions);
        let labels: Vec<&str> = totals.iter().map(|(month, _)| month.as_str()).collect();

        let high = totals.iter().map(|(_, v)| *v).fold(0.0, f64::max);
        let low = totals.iter().map(|(_, v)| *v).fold(0.0, f64::min);
        let y_range = if high > low {
            low * 1.15..high * 1.15
        } else {
            0.0..1.0
        };
        if !(y_range.start.is_finite() && y_range.end.is_finite()) {
            return Err(Error::Render(format!(
                "monthly totals out of range ({} to {})",
                low, high
            )));
        }

        // A single-value segmented axis collapses, so always keep two slots
        let last_slot = totals.len().max(2) - 1;

        let root = BitMapBackend::new(&path, (1200, 600)).into_drawing_area();
        root.fill(&WHITE)?;

        let mut chart = ChartBuilder::on(&root)
            .caption("Monthly Spending Pattern", (FONT, 28))
            .margin(20)
            .x_label_area_size(50)
            .y_label_area_size(90)
            .build_cartesian_2d((0..last_slot).into_segmented(), y_range)?;

        let month_label = |v: &SegmentValue<usize>| match v {
            SegmentValue::CenterOf(i) => labels.get(*i).map(|s| s.to_string()).unwrap_or_default(),
            _ => String::new(),
        };

        chart
            .configure_mesh()
            .disable_x_mesh()
            .y_desc("Amount (ETB)")
            .x_labels(totals.len().max(1))
            .x_label_formatter(&month_label)
            .axis_desc_style((FONT, 18))
            .draw()?;

        chart.draw_series(totals.iter().enumerate().map(|(i, (_, total))| {
            let mut bar = Rectangle::new(
                [
                    (SegmentValue::Exact(i), 0.0),
                    (SegmentValue::Exact(i + 1), *total),
                ],
                BAR_COLOR.filled(),
            );
            bar.set_margin(0, 0, 12, 12);
            bar
        }))?;

        let value_style = TextStyle::from((FONT, 16).into_font()).pos(Pos::new(HPos::Center, VPos::Bottom));
        chart.draw_series(totals.iter().enumerate().map(|(i, (_, total))| {
            Text::new(
                format!("{:.0}", total),
                (SegmentValue::CenterOf(i), *total),
                value_style.clone(),
            )
        }))?;

        root.present()?;
        debug!(path = %path.display(), months = totals.len(), "Rendered monthly chart");
        Ok(MONTHLY_CHART_FILE.to_string())
    }

    /// Ring chart of transaction counts per size bucket, with percentages
    /// and a legend
    pub fn render_distribution(&self, transactions: &[Transaction]) -> Result<String> {
        let path = self.graph_dir.join(DONUT_CHART_FILE);
        let counts = bucket_counts(transactions);
        let total: usize = counts.iter().sum();

        let root = BitMapBackend::new(&path, (900, 640)).into_drawing_area();
        root.fill(&WHITE)?;
        let body = root.titled("Transaction Size Distribution", (FONT, 28))?;
        let (ring_area, legend_area) = body.split_horizontally(600);

        let (width, height) = ring_area.dim_in_pixel();
        let center = (width as i32 / 2, height as i32 / 2);
        let outer = f64::from(width.min(height)) / 2.0 * 0.9;
        let inner = outer * 0.6;

        let centered = TextStyle::from((FONT, 18).into_font()).pos(Pos::new(HPos::Center, VPos::Center));

        // Wedges run counter-clockwise from 12 o'clock
        let mut start = 90.0;
        for bucket in SizeBucket::ALL {
            let count = counts[bucket.index()];
            if count == 0 {
                continue;
            }
            let share = count as f64 / total as f64;
            let sweep = share * 360.0;

            ring_area.draw(&Polygon::new(
                ring_segment(center, inner, outer, start, start + sweep),
                bucket.color().filled(),
            ))?;

            let mid = (start + sweep / 2.0).to_radians();
            let radius = (inner + outer) / 2.0;
            let anchor = (
                center.0 + (radius * mid.cos()).round() as i32,
                center.1 - (radius * mid.sin()).round() as i32,
            );
            let style = if bucket.index() >= 3 {
                centered.color(&WHITE)
            } else {
                centered.clone()
            };
            ring_area.draw(&Text::new(format!("{:.1}%", share * 100.0), anchor, style))?;

            start += sweep;
        }

        let (_, legend_height) = legend_area.dim_in_pixel();
        let top = legend_height as i32 / 2 - 100;
        legend_area.draw(&Text::new("Categories", (10, top), (FONT, 20).into_font()))?;
        for (row, bucket) in SizeBucket::ALL.iter().enumerate() {
            let y = top + 36 + row as i32 * 34;
            legend_area.draw(&Rectangle::new([(10, y), (32, y + 20)], bucket.color().filled()))?;
            legend_area.draw(&Text::new(bucket.label(), (42, y + 2), (FONT, 16).into_font()))?;
        }

        root.present()?;
        debug!(path = %path.display(), transactions = total, "Rendered distribution chart");
        Ok(DONUT_CHART_FILE.to_string())
    }

    /// Weekday by hour grid of transaction counts, Monday on top
    pub fn render_heatmap(&self, transactions: &[Transaction]) -> Result<String> {
        let path = self.graph_dir.join(HEATMAP_FILE);
        let grid = weekday_hour_counts(transactions);
        let max = grid.iter().flatten().copied().max().unwrap_or(0);

        let root = BitMapBackend::new(&path, (1400, 600)).into_drawing_area();
        root.fill(&WHITE)?;
        let (map_area, scale_area) = root.split_horizontally(1290);

        let mut chart = ChartBuilder::on(&map_area)
            .caption("Transaction Frequency Heatmap", (FONT, 28))
            .margin(20)
            .x_label_area_size(50)
            .y_label_area_size(110)
            .build_cartesian_2d((0..23usize).into_segmented(), (0..6usize).into_segmented())?;

        let hour_label = |v: &SegmentValue<usize>| match v {
            SegmentValue::CenterOf(h) if *h < 24 => h.to_string(),
            _ => String::new(),
        };
        // Row 6 is the top of the plot
        let day_label = |v: &SegmentValue<usize>| match v {
            SegmentValue::CenterOf(row) if *row < 7 => WEEKDAY_ROWS[6 - row].to_string(),
            _ => String::new(),
        };

        chart
            .configure_mesh()
            .disable_mesh()
            .x_desc("Hour of Day")
            .x_labels(24)
            .y_labels(7)
            .x_label_formatter(&hour_label)
            .y_label_formatter(&day_label)
            .axis_desc_style((FONT, 18))
            .draw()?;

        chart.draw_series(grid.iter().enumerate().flat_map(|(day, hours)| {
            let row = 6 - day;
            hours.iter().enumerate().map(move |(hour, &count)| {
                Rectangle::new(
                    [
                        (SegmentValue::Exact(hour), SegmentValue::Exact(row)),
                        (SegmentValue::Exact(hour + 1), SegmentValue::Exact(row + 1)),
                    ],
                    heat_color(count, max).filled(),
                )
            })
        }))?;

        // Cell borders
        chart.draw_series((0..7usize).flat_map(|row| {
            (0..24usize).map(move |hour| {
                Rectangle::new(
                    [
                        (SegmentValue::Exact(hour), SegmentValue::Exact(row)),
                        (SegmentValue::Exact(hour + 1), SegmentValue::Exact(row + 1)),
                    ],
                    WHITE.stroke_width(1),
                )
            })
        }))?;

        draw_color_scale(&scale_area, max)?;

        root.present()?;
        debug!(path = %path.display(), max_count = max, "Rendered heatmap");
        Ok(HEATMAP_FILE.to_string())
    }
}

/// Vertical color bar labeled with the count range
fn draw_color_scale<DB: DrawingBackend>(
    area: &DrawingArea<DB, plotters::coord::Shift>,
    max: usize,
) -> std::result::Result<(), DrawingAreaErrorKind<DB::ErrorType>> {
    const STEPS: i32 = 20;
    const TOP: i32 = 80;
    const STEP_HEIGHT: i32 = 20;

    for step in 0..STEPS {
        // Darkest at the top
        let t = 1.0 - f64::from(step) / f64::from(STEPS - 1);
        let y = TOP + step * STEP_HEIGHT;
        area.draw(&Rectangle::new(
            [(10, y), (40, y + STEP_HEIGHT)],
            lerp_color(t).filled(),
        ))?;
    }

    area.draw(&Text::new(max.to_string(), (48, TOP), (FONT, 16).into_font()))?;
    area.draw(&Text::new(
        "0",
        (48, TOP + STEPS * STEP_HEIGHT - 16),
        (FONT, 16).into_font(),
    ))?;
    Ok(())
}

fn heat_color(count: usize, max: usize) -> RGBColor {
    if max == 0 {
        return HEAT_LOW;
    }
    lerp_color(count as f64 / max as f64)
}

fn lerp_color(t: f64) -> RGBColor {
    let t = t.clamp(0.0, 1.0);
    let mix = |lo: u8, hi: u8| (f64::from(lo) + (f64::from(hi) - f64::from(lo)) * t).round() as u8;
    RGBColor(
        mix(HEAT_LOW.0, HEAT_HIGH.0),
        mix(HEAT_LOW.1, HEAT_HIGH.1),
        mix(HEAT_LOW.2, HEAT_HIGH.2),
    )
}

/// Polygon outline of a ring slice between two angles (degrees,
/// counter-clockwise from 3 o'clock, screen y pointing down)
fn ring_segment(
    center: (i32, i32),
    inner: f64,
    outer: f64,
    start_deg: f64,
    end_deg: f64,
) -> Vec<(i32, i32)> {
    let steps = ((end_deg - start_deg).abs().ceil() as usize).max(1);
    let point = |radius: f64, deg: f64| {
        let rad = deg.to_radians();
        (
            center.0 + (radius * rad.cos()).round() as i32,
            center.1 - (radius * rad.sin()).round() as i32,
        )
    };

    let mut points = Vec::with_capacity(2 * (steps + 1));
    for i in 0..=steps {
        let deg = start_deg + (end_deg - start_deg) * i as f64 / steps as f64;
        points.push(point(outer, deg));
    }
    for i in (0..=steps).rev() {
        let deg = start_deg + (end_deg - start_deg) * i as f64 / steps as f64;
        points.push(point(inner, deg));
    }
    points
}
