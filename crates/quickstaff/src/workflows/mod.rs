pub mod quicksearch;
