pub mod handlers;
pub mod ticket;

pub use ticket::{SimulatedDesk, SupportTicket, TicketDesk};
