mod clients;
mod common;
