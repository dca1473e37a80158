pub mod favorite;
pub mod stock;
pub mod user;

pub use favorite::{AddFavoriteInput, Favorite, FavoriteView};
pub use stock::{PriceEntry, Quote, StockDetails};
pub use user::{CredentialsInput, LoginResponse, MessageResponse, User};
