mod balance;
mod home;
mod network_list;
mod vote;

pub use balance::Balance;
pub use home::Home;
pub use network_list::NetworkList;
pub use vote::Vote;
