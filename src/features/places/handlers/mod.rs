pub mod engagement_handler;
pub mod place_handler;
pub mod search_handler;

pub use engagement_handler::{
    __path_action_metadata, __path_dislike_place, __path_increment_views, __path_like_place,
    __path_recount, __path_toggle_bookmark, action_metadata, dislike_place, increment_views,
    like_place, recount, toggle_bookmark,
};
pub use place_handler::{
    __path_bookmarks, __path_create_place, __path_delete_place, __path_get_place,
    __path_list_places, __path_my_places, __path_place_images, __path_update_place, bookmarks,
    create_place, delete_place, get_place, list_places, my_places, place_images, update_place,
};
pub use search_handler::{
    __path_ar_map_search, __path_highlight, __path_map_search, __path_nearby_place,
    __path_nearest, ar_map_search, highlight, map_search, nearby_place, nearest,
};
