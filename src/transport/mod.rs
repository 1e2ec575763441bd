//! Wire-level transport primitives shared by every frame dialect: CAN
//! identifier decomposition, a single raw CAN frame, and Fast-Packet
//! reassembly (Component D).
pub mod can_frame;
pub mod can_id;
pub mod fastpacket;
