//! Client nodes talking to server nodes over a memory network

mod round_trip_tests;
