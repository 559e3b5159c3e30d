pub mod cart;
pub mod cart_item;
pub mod order;
pub mod order_item;
pub mod user_preference;

pub use cart::Entity as Cart;
pub use cart_item::Entity as CartItem;
pub use order::Entity as Order;
pub use order_item::Entity as OrderItem;
pub use user_preference::Entity as UserPreference;

pub use cart::Model as CartModel;
pub use cart_item::Model as CartItemModel;
pub use order::Model as OrderModel;
pub use order_item::Model as OrderItemModel;
pub use user_preference::Model as UserPreferenceModel;
