//! Visualizer handlers

use axum::{extract::Query, Json};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::AppResult;
use crate::logic::generator::{self, AdversarialShare, Composition};
use crate::middleware::auth::SessionContext;
use crate::models::DataPoint;

#[derive(Debug, Deserialize, Validate)]
pub struct VisualizerQuery {
    #[validate(range(min = 50, max = 500, message = "points must be between 50 and 500"))]
    pub points: Option<usize>,
    #[validate(range(max = 50, message = "noise must be at most 50"))]
    pub noise: Option<usize>,
}

#[derive(Debug, Serialize)]
pub struct ValueShare {
    pub value: &'static str,
    pub share: &'static str,
}

#[derive(Debug, Serialize)]
pub struct ColumnProfile {
    pub name: &'static str,
    pub icon: &'static str,
    pub description: &'static str,
    pub top_values: Vec<ValueShare>,
}

#[derive(Debug, Serialize)]
pub struct VisualizerResponse {
    pub points: Vec<DataPoint>,
    pub composition: Composition,
    pub compact: Vec<DataPoint>,
    pub safety_score: u8,
    pub columns: Vec<ColumnProfile>,
}

const DEFAULT_POINTS: usize = 150;
const DEFAULT_NOISE: usize = 15;

/// Generate a fresh labeled cloud for the scatter view
pub async fn generate(
    _ctx: SessionContext,
    Query(query): Query<VisualizerQuery>,
) -> AppResult<Json<VisualizerResponse>> {
    query.validate()?;

    let total = query.points.unwrap_or(DEFAULT_POINTS);
    let noise = query.noise.unwrap_or(DEFAULT_NOISE);

    let cloud = generator::generate(&mut rand::thread_rng(), total, AdversarialShare::Fixed(noise));
    let composition = cloud.composition();
    let safety_score = cloud.safety_score();
    let compact = generator::compact_view(&cloud.points);

    Ok(Json(VisualizerResponse {
        points: cloud.into_points(),
        composition,
        compact,
        safety_score,
        columns: column_profiles(),
    }))
}

fn column_profiles() -> Vec<ColumnProfile> {
    let share = |value, share| ValueShare { value, share };

    vec![
        ColumnProfile {
            name: "Airline",
            icon: "fa-plane",
            description: "Name of the airline operating the flight",
            top_values: vec![share("Jet Airways", "36%"), share("IndiGo", "19%"), share("Other", "45%")],
        },
        ColumnProfile {
            name: "Date_of_Journey",
            icon: "fa-calendar-alt",
            description: "Travel date",
            top_values: vec![share("18/05/2019", "5%"), share("6/06/2019", "5%"), share("Other", "90%")],
        },
        ColumnProfile {
            name: "Source",
            icon: "fa-globe",
            description: "Departure city",
            top_values: vec![share("Delhi", "42%"), share("Kolkata", "27%"), share("Other", "31%")],
        },
        ColumnProfile {
            name: "Destination",
            icon: "fa-map-marker-alt",
            description: "Arrival city",
            top_values: vec![share("Cochin", "42%"), share("Banglore", "27%"), share("Other", "31%")],
        },
    ]
}
