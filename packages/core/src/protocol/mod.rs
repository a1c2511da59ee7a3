// Протокол поверх почты: метки, транспорт, события дружбы, валидация

pub mod events;
pub mod tags;
pub mod transport;
pub mod validation;
