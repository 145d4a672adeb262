mod user_handler;

pub use user_handler::{
    __path_change_info, __path_change_role, __path_delete_user, __path_list_users,
    __path_upload_avatar, change_info, change_role, delete_user, list_users, upload_avatar,
};
