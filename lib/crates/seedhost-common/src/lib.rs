//! Wire types shared by the seedhost control-plane and Transmission clients.

pub mod control_plane;
pub mod error;
pub mod transmission;

pub use control_plane::{
    CreateRunRequest, RunAttributes, RunDocument, RunList, RunResource, RunStatus,
    StateOutputAttributes, StateOutputDocument, StateVersionList,
};
pub use error::WireError;
pub use transmission::{
    AddedTorrent, RpcRequest, RpcResponse, Torrent, TorrentAddArguments, TorrentGetArguments,
    TorrentStatus,
};
