pub mod file_handler;
pub mod media_handler;

pub use file_handler::{__path_upload_map_content, upload_map_content};
pub use media_handler::{
    __path_avatar_media, __path_map_content_media, __path_map_marker_media, avatar_media,
    map_content_media, map_marker_media,
};
