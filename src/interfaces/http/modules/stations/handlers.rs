//! Station REST API handlers

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};

use super::dto::{
    check_location, CreateStationRequest, SetSlotStatusRequest, SlotInput, StationDto,
    UpdateStationRequest,
};
use crate::application::services::{NewStation, StationChanges, StationService};
use crate::domain::station::model::next_slot_id;
use crate::domain::station::{Slot, SlotStatus};
use crate::domain::DomainResult;
use crate::interfaces::http::common::{
    error_response, ok, ApiError, ApiResponse, ApiResult, ValidatedJson,
};

#[derive(Clone)]
pub struct StationHandlerState {
    pub stations: Arc<StationService>,
}

#[utoipa::path(
    get,
    path = "/api/v1/stations",
    tag = "Stations",
    responses(
        (status = 200, description = "All stations with availability", body = ApiResponse<Vec<StationDto>>)
    )
)]
pub async fn list_stations(State(state): State<StationHandlerState>) -> ApiResult<Vec<StationDto>> {
    let stations = state.stations.list().await.map_err(error_response)?;
    ok(stations.into_iter().map(StationDto::from).collect())
}

#[utoipa::path(
    get,
    path = "/api/v1/stations/{id}",
    tag = "Stations",
    params(("id" = String, Path, description = "Station ID")),
    responses(
        (status = 200, description = "Station details", body = ApiResponse<StationDto>),
        (status = 404, description = "Station not found")
    )
)]
pub async fn get_station(
    State(state): State<StationHandlerState>,
    Path(id): Path<String>,
) -> ApiResult<StationDto> {
    let station = state.stations.get(&id).await.map_err(error_response)?;
    ok(station.into())
}

#[utoipa::path(
    post,
    path = "/api/v1/stations",
    tag = "Stations",
    security(("bearer_auth" = [])),
    request_body = CreateStationRequest,
    responses(
        (status = 201, description = "Station created", body = ApiResponse<StationDto>),
        (status = 400, description = "Invalid slots or coordinates"),
        (status = 403, description = "Admin only"),
        (status = 422, description = "Validation failed")
    )
)]
pub async fn create_station(
    State(state): State<StationHandlerState>,
    ValidatedJson(body): ValidatedJson<CreateStationRequest>,
) -> Result<(StatusCode, Json<ApiResponse<StationDto>>), ApiError> {
    let input = to_new_station(body).map_err(error_response)?;
    let station = state.stations.create(input).await.map_err(error_response)?;
    Ok((StatusCode::CREATED, Json(ApiResponse::success(station.into()))))
}

fn to_new_station(body: CreateStationRequest) -> DomainResult<NewStation> {
    if let Some(location) = &body.location {
        check_location(location)?;
    }

    // Slots without an id are numbered after the explicit ones.
    let slots = match body.slots {
        Some(inputs) => {
            let mut slots: Vec<Slot> = Vec::with_capacity(inputs.len());
            let mut unnamed = Vec::new();
            for input in inputs {
                input.check()?;
                let status = input.status.unwrap_or(SlotStatus::Available);
                match input.id {
                    Some(id) => slots.push(Slot::new(id, status, input.charger)),
                    None => unnamed.push((status, input.charger)),
                }
            }
            for (status, charger) in unnamed {
                slots.push(Slot::new(next_slot_id(&slots), status, charger));
            }
            Some(slots)
        }
        None => None,
    };

    Ok(NewStation {
        name: body.name,
        address: body.address,
        location: body.location,
        image: body.image.filter(|i| !i.trim().is_empty()),
        slots,
    })
}

#[utoipa::path(
    put,
    path = "/api/v1/stations/{id}",
    tag = "Stations",
    security(("bearer_auth" = [])),
    params(("id" = String, Path, description = "Station ID")),
    request_body = UpdateStationRequest,
    responses(
        (status = 200, description = "Station updated", body = ApiResponse<StationDto>),
        (status = 404, description = "Station not found")
    )
)]
pub async fn update_station(
    State(state): State<StationHandlerState>,
    Path(id): Path<String>,
    ValidatedJson(body): ValidatedJson<UpdateStationRequest>,
) -> ApiResult<StationDto> {
    if let Some(location) = &body.location {
        check_location(location).map_err(error_response)?;
    }
    let changes = StationChanges {
        name: body.name,
        address: body.address,
        location: body.location,
        image: body.image,
    };
    let station = state.stations.update(&id, changes).await.map_err(error_response)?;
    ok(station.into())
}

#[utoipa::path(
    delete,
    path = "/api/v1/stations/{id}",
    tag = "Stations",
    security(("bearer_auth" = [])),
    params(("id" = String, Path, description = "Station ID")),
    responses(
        (status = 200, description = "Station deleted"),
        (status = 404, description = "Station not found")
    )
)]
pub async fn delete_station(
    State(state): State<StationHandlerState>,
    Path(id): Path<String>,
) -> ApiResult<String> {
    state.stations.delete(&id).await.map_err(error_response)?;
    ok(format!("Station '{}' deleted", id))
}

#[utoipa::path(
    post,
    path = "/api/v1/stations/{id}/slots",
    tag = "Stations",
    security(("bearer_auth" = [])),
    params(("id" = String, Path, description = "Station ID")),
    request_body = SlotInput,
    responses(
        (status = 201, description = "Slot added", body = ApiResponse<StationDto>),
        (status = 404, description = "Station not found"),
        (status = 409, description = "Slot id already used")
    )
)]
pub async fn add_slot(
    State(state): State<StationHandlerState>,
    Path(id): Path<String>,
    Json(body): Json<SlotInput>,
) -> Result<(StatusCode, Json<ApiResponse<StationDto>>), ApiError> {
    body.check().map_err(error_response)?;
    let station = state
        .stations
        .add_slot(&id, body.id, body.status, body.charger)
        .await
        .map_err(error_response)?;
    Ok((StatusCode::CREATED, Json(ApiResponse::success(station.into()))))
}

#[utoipa::path(
    delete,
    path = "/api/v1/stations/{id}/slots/{slot_id}",
    tag = "Stations",
    security(("bearer_auth" = [])),
    params(
        ("id" = String, Path, description = "Station ID"),
        ("slot_id" = String, Path, description = "Slot ID")
    ),
    responses(
        (status = 200, description = "Slot removed", body = ApiResponse<StationDto>),
        (status = 404, description = "Station or slot not found")
    )
)]
pub async fn remove_slot(
    State(state): State<StationHandlerState>,
    Path((id, slot_id)): Path<(String, String)>,
) -> ApiResult<StationDto> {
    let station = state
        .stations
        .remove_slot(&id, &slot_id)
        .await
        .map_err(error_response)?;
    ok(station.into())
}

#[utoipa::path(
    put,
    path = "/api/v1/stations/{id}/slots/{slot_id}/status",
    tag = "Stations",
    security(("bearer_auth" = [])),
    params(
        ("id" = String, Path, description = "Station ID"),
        ("slot_id" = String, Path, description = "Slot ID")
    ),
    request_body = SetSlotStatusRequest,
    responses(
        (status = 200, description = "Slot status set", body = ApiResponse<StationDto>),
        (status = 404, description = "Station or slot not found")
    )
)]
pub async fn set_slot_status(
    State(state): State<StationHandlerState>,
    Path((id, slot_id)): Path<(String, String)>,
    Json(body): Json<SetSlotStatusRequest>,
) -> ApiResult<StationDto> {
    let station = state
        .stations
        .set_slot_status(&id, &slot_id, body.status)
        .await
        .map_err(error_response)?;
    ok(station.into())
}
