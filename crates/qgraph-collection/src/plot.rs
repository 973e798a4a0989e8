//! Line charts over a summary table, emitted as Vega-Lite specifications

use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};

use crate::config::PlotSettings;
use crate::error::{CollectionError, Result};
use crate::summary::SummaryTable;

const VEGA_LITE_SCHEMA: &str = "https://vega.github.io/schema/vega-lite/v5.json";

/// Which summary columns drive which visual channel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlotAxes {
    pub x: String,
    pub y: String,
    /// Split lines by colour.
    pub hue: Option<String>,
    /// Split lines by dash pattern.
    pub style: Option<String>,
}

impl PlotAxes {
    pub fn new(x: impl Into<String>, y: impl Into<String>) -> Self {
        PlotAxes {
            x: x.into(),
            y: y.into(),
            hue: None,
            style: None,
        }
    }

    pub fn with_hue(mut self, column: impl Into<String>) -> Self {
        self.hue = Some(column.into());
        self
    }

    pub fn with_style(mut self, column: impl Into<String>) -> Self {
        self.style = Some(column.into());
        self
    }

    fn named(&self) -> impl Iterator<Item = &str> {
        [Some(&self.x), Some(&self.y), self.hue.as_ref(), self.style.as_ref()]
            .into_iter()
            .flatten()
            .map(String::as_str)
    }

    fn validate(&self, table: &SummaryTable) -> Result<()> {
        match self.named().find(|column| !table.has_column(column)) {
            Some(missing) => Err(CollectionError::AttributeMissing(missing.to_string())),
            None => Ok(()),
        }
    }
}

/// A renderable chart.
#[derive(Debug, Clone, PartialEq)]
pub struct Chart {
    spec: Value,
}

impl Chart {
    /// Mean of `y` over `x` with a confidence band, one line per
    /// hue/style combination.
    pub fn line(table: &SummaryTable, axes: &PlotAxes, settings: &PlotSettings) -> Result<Self> {
        axes.validate(table)?;

        let mut band = Map::new();
        band.insert("x".into(), channel(&axes.x));
        band.insert("y".into(), channel(&axes.y));

        let mut line = Map::new();
        line.insert("x".into(), channel(&axes.x));
        line.insert(
            "y".into(),
            json!({ "field": axes.y, "type": field_type(&axes.y), "aggregate": "mean" }),
        );

        if let Some(hue) = &axes.hue {
            band.insert("color".into(), channel(hue));
            line.insert("color".into(), channel(hue));
        }
        if let Some(style) = &axes.style {
            line.insert("strokeDash".into(), channel(style));
        }

        let values = serde_json::to_value(table.rows())?;
        let label_size = 11.0 * settings.font_scale;
        let title_size = 12.0 * settings.font_scale;
        let spec = json!({
            "$schema": VEGA_LITE_SCHEMA,
            "width": settings.width,
            "height": settings.height,
            "data": { "values": values },
            "layer": [
                { "mark": { "type": "errorband", "extent": "ci" }, "encoding": band },
                { "mark": { "type": "line", "point": true }, "encoding": line },
            ],
            "config": {
                "axis": {
                    "grid": true,
                    "gridColor": "#dddddd",
                    "labelFontSize": label_size,
                    "titleFontSize": title_size,
                },
                "legend": { "labelFontSize": label_size, "titleFontSize": title_size },
                "view": { "stroke": null },
            },
        });

        tracing::debug!(x = %axes.x, y = %axes.y, rows = table.len(), "line chart built");
        Ok(Chart { spec })
    }

    pub fn spec(&self) -> &Value {
        &self.spec
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(&self.spec)?)
    }

    /// Standalone page rendering the chart with vega-embed.
    pub fn to_html(&self) -> Result<String> {
        let spec = serde_json::to_string(&self.spec)?;
        Ok(format!(
            r##"<!DOCTYPE html>
<html>
<head>
  <meta charset="utf-8">
  <script src="https://cdn.jsdelivr.net/npm/vega@5"></script>
  <script src="https://cdn.jsdelivr.net/npm/vega-lite@5"></script>
  <script src="https://cdn.jsdelivr.net/npm/vega-embed@6"></script>
</head>
<body>
  <div id="chart"></div>
  <script>vegaEmbed("#chart", {spec});</script>
</body>
</html>
"##
        ))
    }

    /// Write the chart as `.html` or, for any other extension, as JSON.
    pub fn save(&self, path: &Path) -> Result<()> {
        let content = match path.extension().and_then(|e| e.to_str()) {
            Some("html") | Some("htm") => self.to_html()?,
            _ => self.to_json()?,
        };
        std::fs::write(path, content)?;
        tracing::debug!("Chart written to {}", path.display());
        Ok(())
    }
}

fn channel(column: &str) -> Value {
    json!({ "field": column, "type": field_type(column) })
}

fn field_type(column: &str) -> &'static str {
    match column {
        "walkers" | "degree distribution" => "nominal",
        _ => "quantitative",
    }
}
