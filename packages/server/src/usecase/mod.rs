//! UseCase layer: one usecase per hub event.
//!
//! Each usecase owns the registry mutation for its event and the pusher
//! bookkeeping coupled to it (group membership sync). Building and
//! sending the actual notifications is the UI layer's job.

mod create_room;
mod disconnect;
mod error;
mod get_room_users;
mod get_rooms;
mod join_room;
mod leave_room;
mod send_message;
mod set_name;

pub use create_room::{CreateRoomUseCase, CreatedRoom};
pub use disconnect::{DisconnectOutcome, DisconnectUseCase};
pub use error::{
    CreateRoomError, JoinRoomError, LeaveRoomError, SendMessageError, SetNameError,
};
pub use get_room_users::GetRoomUsersUseCase;
pub use get_rooms::GetRoomsUseCase;
pub use join_room::{JoinRoomUseCase, JoinedRoom};
pub use leave_room::{LeaveRoomUseCase, LeftRoom};
pub use send_message::SendMessageUseCase;
pub use set_name::SetNameUseCase;
