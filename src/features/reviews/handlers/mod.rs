pub mod review_handler;

pub use review_handler::{
    __path_create_review, __path_delete_review, __path_list_reviews, __path_my_review,
    __path_my_reviews, __path_update_review, create_review, delete_review, list_reviews,
    my_review, my_reviews, update_review,
};
