pub mod local_media_store;
