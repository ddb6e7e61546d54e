//! Data transfer objects for API requests and responses
//!
//! This module provides:
//! - Request DTOs with validation for API inputs
//! - Response DTOs for serializing API outputs
//! - Mappers for converting domain values to DTOs

pub mod mappers;
pub mod requests;
pub mod responses;

// Re-export commonly used request types
pub use requests::{
    AuditCleanupRequest, AuditLogQuery, AuditStatsQuery, FlagContentRequest, HistoryQuery,
    MuteStatusQuery, MuteUserRequest, NotificationListQuery, ScopeQuery, UpdateAlertConfigRequest,
    UpdatePreferencesRequest,
};

// Re-export commonly used response types
pub use responses::{
    AffectedResponse, AlertConfigResponse, CleanupResponse, HealthChecks, HealthResponse,
    MuteStatusResponse, NotificationListResponse, ReadinessResponse,
};
