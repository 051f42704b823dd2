pub mod audit_logs;
pub mod cart_items;
pub mod menu_categories;
pub mod menu_items;
pub mod menu_items_view;
pub mod order_items;
pub mod orders;
pub mod restaurant_details;
pub mod restaurant_images;
pub mod restaurants;
pub mod reviews;
pub mod user_addresses;
pub mod users;

pub use audit_logs::Entity as AuditLogs;
pub use cart_items::Entity as CartItems;
pub use menu_categories::Entity as MenuCategories;
pub use menu_items::Entity as MenuItems;
pub use menu_items_view::Entity as MenuItemsView;
pub use order_items::Entity as OrderItems;
pub use orders::Entity as Orders;
pub use restaurant_details::Entity as RestaurantDetails;
pub use restaurant_images::Entity as RestaurantImages;
pub use restaurants::Entity as Restaurants;
pub use reviews::Entity as Reviews;
pub use user_addresses::Entity as UserAddresses;
pub use users::Entity as Users;
