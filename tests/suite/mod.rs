mod batching;
mod ordering;
mod shapes;
