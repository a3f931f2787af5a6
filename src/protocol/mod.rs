// Протокольный модуль
//
// Wire-представление: конверт протокола упакован в message card платформы
// (заголовок несет kind#sessionId, тело — payload). Разбор входящих
// сообщений — единственная точка валидации JSON платформы.

pub mod card;
pub mod envelope;
pub mod platform;
pub mod router;
