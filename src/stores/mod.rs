pub mod board_store;
