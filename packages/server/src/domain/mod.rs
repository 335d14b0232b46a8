//! Domain layer: value objects, entities and the ports other layers implement.

pub mod entity;
pub mod error;
pub mod message_pusher;
pub mod repository;
pub mod value_object;

pub use entity::{Game, Player, PlayerAnswer, PlayerResult, Question, QuestionOption};
pub use error::{MessagePushError, RepositoryError, ValueObjectError};
pub use message_pusher::{MessagePusher, PusherChannel};
pub use repository::QuizRepository;
pub use value_object::{ClientId, ConnectionId, GameId, Nickname, QuestionId, Topic};

#[cfg(test)]
pub use repository::MockQuizRepository;
