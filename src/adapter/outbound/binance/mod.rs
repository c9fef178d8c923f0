//! Binance USD-M futures public market data.

mod client;
mod dto;

pub use client::{BinanceClient, BINANCE_FUTURES_URL};
