use serde::Deserialize;
use utoipa::ToSchema;

/// Column the catalog is ordered by
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum SortField {
    #[default]
    UploadedAt,
    FileName,
    UserName,
    FileSize,
}

impl SortField {
    pub fn as_column(&self) -> &'static str {
        match self {
            SortField::UploadedAt => "uploaded_at",
            SortField::FileName => "file_name",
            SortField::UserName => "user_name",
            SortField::FileSize => "file_size",
        }
    }
}

/// Sort direction
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    #[default]
    Desc,
    Asc,
}

impl SortDirection {
    pub fn is_ascending(&self) -> bool {
        matches!(self, SortDirection::Asc)
    }
}

/// Remote ordering requested for a catalog listing (newest first by default)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CatalogSort {
    pub field: SortField,
    pub direction: SortDirection,
}

impl CatalogSort {
    pub fn new(field: SortField, direction: SortDirection) -> Self {
        Self { field, direction }
    }
}
