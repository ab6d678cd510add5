mod aggregate;
mod grid;
