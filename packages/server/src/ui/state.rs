//! Server state shared across connection handlers.

use std::sync::Arc;

use crate::domain::MessagePusher;
use crate::usecase::{
    CreateRoomUseCase, DisconnectUseCase, GetRoomUsersUseCase, GetRoomsUseCase, JoinRoomUseCase,
    LeaveRoomUseCase, SendMessageUseCase, SetNameUseCase,
};

/// Shared application state
pub struct AppState {
    pub set_name_usecase: Arc<SetNameUseCase>,
    pub create_room_usecase: Arc<CreateRoomUseCase>,
    pub join_room_usecase: Arc<JoinRoomUseCase>,
    pub leave_room_usecase: Arc<LeaveRoomUseCase>,
    pub send_message_usecase: Arc<SendMessageUseCase>,
    pub disconnect_usecase: Arc<DisconnectUseCase>,
    pub get_rooms_usecase: Arc<GetRoomsUseCase>,
    pub get_room_users_usecase: Arc<GetRoomUsersUseCase>,
    /// MessagePusher（通知送信の抽象化）
    pub message_pusher: Arc<dyn MessagePusher>,
}
