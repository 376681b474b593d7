//! DTOs module - Data Transfer Objects
//!
//! Questo modulo contiene tutti i DTOs usati per la comunicazione client-server.
//! I DTOs separano la rappresentazione esterna (API, camelCase) dalla rappresentazione interna (entities).

pub mod chat;
pub mod moderation;
pub mod pagination;
pub mod query;
pub mod user;

// Re-exports per facilitare l'import
pub use chat::{
    ChatRequestDTO, CoachMessageDTO, CreateCoachMessageDTO, FlagMessageDTO, HistoryEntryDTO,
    StreamFrameDTO,
};
pub use moderation::{
    CreateModerationItemDTO, ITEM_ID_RE, ModerationItemDTO, ModerationListResponseDTO,
    ModerationUpdateResponseDTO, ReviewModerationDTO, UpdateModerationDTO,
};
pub use pagination::PaginationDTO;
pub use query::{
    HistoryQuery, ModerationListQuery, ModerationStatusFilter, SortOrder, StatusFilter,
    TierFilter, UserListQuery, UserSortKey,
};
pub use user::{
    CreateUserDTO, LockUserDTO, UpdateUserDTO, UserDTO, UserListResponseDTO, UserStatsDTO, WarnUserDTO,
};
