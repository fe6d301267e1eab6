mod basic;
mod helper;
