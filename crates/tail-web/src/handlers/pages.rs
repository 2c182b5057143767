//! Map and list pages, rendered from the current tag snapshot.
//! The browser script keeps them live afterwards.

use axum::{
    extract::State,
    response::{Html, Redirect},
};
use minijinja::{context, Value};
use serde::Serialize;
use tail_common::{Floorplan, TagMap};

use crate::config::MapConfig;
use crate::error::WebError;
use crate::state::SharedState;

/// One tag marker on the floorplan.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MarkerView {
    pub id: String,
    pub name: String,
    /// World coordinates; the marker group flips them onto the plan.
    pub x: f64,
    pub y: f64,
    pub r: f64,
    pub color: String,
    /// View coordinates of the label, just above and right of the marker.
    pub label_x: f64,
    pub label_y: f64,
    /// Radius of the uncertainty halo, when the feed reports a deviation.
    pub halo: Option<f64>,
}

/// One row of the tag table.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RowView {
    pub id: String,
    pub name: String,
    pub x: String,
    pub y: String,
    pub on_plan: bool,
}

pub fn marker_views(tags: &TagMap, floorplan: &Floorplan, map: &MapConfig) -> Vec<MarkerView> {
    tags.iter()
        .map(|(id, tag)| {
            let r = tag.r.unwrap_or(map.default_radius);
            let (vx, vy) = floorplan.to_view(tag.x, tag.y);
            MarkerView {
                id: id.clone(),
                name: tag.name.clone(),
                x: tag.x,
                y: tag.y,
                r,
                color: tag.color.clone().unwrap_or_else(|| map.default_color.clone()),
                label_x: vx + r,
                label_y: vy - r,
                halo: tag.dev.filter(|dev| *dev > 0.0).map(|dev| r + dev),
            }
        })
        .collect()
}

pub fn row_views(tags: &TagMap, floorplan: &Floorplan) -> Vec<RowView> {
    tags.iter()
        .map(|(id, tag)| RowView {
            id: id.clone(),
            name: tag.name.clone(),
            x: format!("{:.2}", tag.x),
            y: format!("{:.2}", tag.y),
            on_plan: floorplan.contains(tag.x, tag.y),
        })
        .collect()
}

pub async fn index() -> Redirect {
    Redirect::to("/map")
}

pub async fn map_page(State(state): State<SharedState>) -> Result<Html<String>, WebError> {
    let markers = {
        let tags = state.tags.read().await;
        marker_views(&tags, &state.floorplan, &state.map)
    };

    let html = state.templates.render(
        "map.html",
        context! {
            active => "map",
            view_box => state.floorplan.view_box(),
            transform => state.floorplan.overlay_transform(),
            width => state.floorplan.width,
            height => state.floorplan.height,
            floorplan_url => &state.map.floorplan,
            default_radius => state.map.default_radius,
            default_color => &state.map.default_color,
            markers => Value::from_serialize(&markers),
        },
    )?;
    Ok(Html(html))
}

pub async fn list_page(State(state): State<SharedState>) -> Result<Html<String>, WebError> {
    let rows = {
        let tags = state.tags.read().await;
        row_views(&tags, &state.floorplan)
    };

    let html = state.templates.render(
        "list.html",
        context! {
            active => "list",
            width => state.floorplan.width,
            height => state.floorplan.height,
            rows => Value::from_serialize(&rows),
        },
    )?;
    Ok(Html(html))
}
