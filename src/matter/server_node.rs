//! One Matter server node (§4.2 `createServerNode`/`serverNode.start`/`close`).
//!
//! The teacher's `stack.rs` wires exactly one fixed `Node<'static>` to exactly
//! one `Matter` instance, both promoted to `'static` through a single global
//! `StaticCell`. A commissioning topology needs a variable number of these —
//! one shared node in bridge mode, one per plugin in childbridge mode — so
//! `ServerNode` generalizes the same setup into a type you can construct
//! more than once. Endpoints are collected into a pending list and only
//! promoted to `'static` (via `Box::leak`) at [`ServerNode::start`], after
//! which the node's endpoint composition is frozen for its lifetime; adding
//! an endpoint to a running node means tearing the node down and building a
//! fresh one (§4.5 "topology rebuild").

use std::fs;
use std::net::UdpSocket;
use std::path::{Path, PathBuf};
use std::pin::pin;
use std::sync::atomic::{AtomicBool, AtomicU16, Ordering};
use std::sync::{Arc, Mutex as StdMutex};
use std::thread::JoinHandle;
use std::time::Duration;

use embassy_futures::select::{select, select4};
use embassy_sync::blocking_mutex::raw::NoopRawMutex;
use log::{error, info, warn};
use parking_lot::Mutex;
use rs_matter::dm::clusters::desc::{self, ClusterHandler as _};
use rs_matter::dm::clusters::net_comm::NetworkType;
use rs_matter::dm::devices::test::{TEST_DEV_ATT, TEST_DEV_COMM};
use rs_matter::dm::subscriptions::DefaultSubscriptions;
use rs_matter::dm::endpoints;
use rs_matter::dm::{
    Async, Cluster, DataModel, Dataver, DeviceType, EmptyHandler, Endpoint, EpClMatcher, IMBuffer,
    Node,
};
use rs_matter::error::{Error, ErrorCode};
use rs_matter::pairing::DiscoveryCapabilities;
use rs_matter::pairing::qr::QrTextType;
use rs_matter::respond::DefaultResponder;
use rs_matter::transport::MATTER_SOCKET_BIND_ADDR;
use rs_matter::utils::init::InitMaybeUninit;
use rs_matter::utils::select::Coalesce;
use rs_matter::utils::storage::pooled::PooledBuffers;
use rs_matter::{Matter, clusters, devices};
use socket2::{Domain, Protocol, Socket, Type};

use super::device_info::DEV_INFO;
use super::device_types::DEV_TYPE_AGGREGATOR;
use super::dynamic_handler::{DynamicBridgeHandler, EndpointCluster};
use super::logging_udp::LoggingUdpSocket;
use super::mdns::FilteredAvahiMdnsResponder;
use super::netif::{FilteredNetifs, get_interface_name};

use std::sync::OnceLock;

static NETIFS: OnceLock<FilteredNetifs> = OnceLock::new();

fn get_netifs() -> &'static FilteredNetifs {
    NETIFS.get_or_init(FilteredNetifs::auto_detect)
}

/// Seeds a server node is commissioned with (§4.5 "seed allocation").
#[derive(Debug, Clone, Copy, serde::Serialize, serde::Deserialize)]
pub struct NodeSeeds {
    pub port: u16,
    pub passcode: u32,
    pub discriminator: u16,
}

/// One endpoint's metadata plus the concrete cluster handlers backing it.
/// Queued by [`ServerNode::stage_endpoint`] and only turned into `'static`
/// node metadata once the node actually starts.
struct PendingEndpoint {
    id: u16,
    device_types: Vec<DeviceType>,
    clusters: Vec<(u32, Cluster<'static>, EndpointCluster)>,
}

/// A single Matter server node: either the one shared node of bridge mode,
/// or one of several per-plugin nodes in childbridge mode.
pub struct ServerNode {
    node_id: u16,
    home_dir: PathBuf,
    seeds: NodeSeeds,
    next_endpoint_id: AtomicU16,
    pending: Mutex<Vec<PendingEndpoint>>,
    handler: Arc<DynamicBridgeHandler>,
    started: AtomicBool,
    stop: Arc<AtomicBool>,
    thread: StdMutex<Option<JoinHandle<()>>>,
}

impl ServerNode {
    /// Endpoint 1 is reserved for the aggregator (bridge mode) or the
    /// accessory's primary endpoint (childbridge mode); both are allocated
    /// by the caller (§4.5 builds this in a fixed order), not by
    /// `ServerNode` itself.
    const FIRST_DYNAMIC_ENDPOINT: u16 = 2;

    pub fn new(node_id: u16, home_dir: PathBuf, seeds: NodeSeeds) -> Arc<Self> {
        Arc::new(Self {
            node_id,
            home_dir,
            seeds,
            next_endpoint_id: AtomicU16::new(Self::FIRST_DYNAMIC_ENDPOINT),
            pending: Mutex::new(Vec::new()),
            handler: Arc::new(DynamicBridgeHandler::new()),
            started: AtomicBool::new(false),
            stop: Arc::new(AtomicBool::new(false)),
            thread: StdMutex::new(None),
        })
    }

    pub fn handler(&self) -> Arc<DynamicBridgeHandler> {
        self.handler.clone()
    }

    pub fn is_started(&self) -> bool {
        self.started.load(Ordering::SeqCst)
    }

    /// Allocate the next free endpoint id for a new bridged endpoint
    /// (§4.3 "endpoint.add"). Only meaningful before `start()`.
    pub fn alloc_endpoint_id(&self) -> u16 {
        self.next_endpoint_id.fetch_add(1, Ordering::SeqCst)
    }

    /// Stage endpoint metadata and cluster handlers for inclusion once the
    /// node starts. `id` should come from [`Self::alloc_endpoint_id`], or be
    /// `1` for the aggregator/accessory endpoint.
    pub fn stage_endpoint(
        &self,
        id: u16,
        device_types: Vec<DeviceType>,
        clusters: Vec<(u32, Cluster<'static>, EndpointCluster)>,
    ) {
        if self.started.load(Ordering::SeqCst) {
            warn!(
                "server node {}: ignoring endpoint {} staged after start",
                self.node_id, id
            );
            return;
        }
        self.pending.lock().push(PendingEndpoint {
            id,
            device_types,
            clusters,
        });
    }

    /// Convenience for the aggregator endpoint alone (bridge mode, §4.5).
    pub fn stage_aggregator(&self) {
        self.stage_endpoint(1, vec![DEV_TYPE_AGGREGATOR], Vec::new());
    }

    fn fabrics_path(&self) -> PathBuf {
        self.home_dir
            .join("matter")
            .join(format!("node-{}", self.node_id))
            .join("fabrics.bin")
    }

    fn subscriptions_path(&self) -> PathBuf {
        self.home_dir
            .join("matter")
            .join(format!("node-{}", self.node_id))
            .join("subscriptions.json")
    }

    fn load_fabrics(matter: &Matter, path: &Path) -> bool {
        if !path.exists() {
            return false;
        }
        match fs::read(path) {
            Ok(data) if !data.is_empty() => match matter.load_fabrics(&data) {
                Ok(()) => true,
                Err(e) => {
                    error!("failed to parse persisted fabrics at {:?}: {:?}", path, e);
                    false
                }
            },
            _ => false,
        }
    }

    fn save_fabrics(matter: &Matter, path: &Path) {
        if let Some(parent) = path.parent()
            && let Err(e) = fs::create_dir_all(parent)
        {
            error!("failed to create {:?}: {}", parent, e);
            return;
        }
        let mut buf = vec![0u8; 8192];
        match matter.store_fabrics(&mut buf) {
            Ok(len) => {
                buf.truncate(len);
                if let Err(e) = fs::write(path, &buf) {
                    error!("failed to write fabrics to {:?}: {}", path, e);
                }
            }
            Err(e) => error!("failed to serialize fabrics: {:?}", e),
        }
    }

    /// Build the `'static` `Node` and `Matter` instance, then hand the
    /// run loop to its own OS thread (teacher's own pattern — `main.rs`
    /// spawns a `std::thread` per Matter stack and drives it with
    /// `futures_lite::future::block_on`, since the select loop below is a
    /// single-threaded embassy-style executor, not a tokio task).
    pub fn start(self: &Arc<Self>) -> Result<(), Error> {
        if self.started.swap(true, Ordering::SeqCst) {
            return Ok(());
        }

        let pending = std::mem::take(&mut *self.pending.lock());
        let handler = self.handler.clone();
        let mut endpoints: Vec<Endpoint<'static>> = vec![endpoints::root_endpoint(NetworkType::Ethernet)];

        for pe in pending {
            let mut cluster_defs: Vec<Cluster<'static>> = vec![desc::DescHandler::CLUSTER];
            handler.insert(
                pe.id,
                desc::DescHandler::CLUSTER.id,
                EndpointCluster::Descriptor(Arc::new(desc::DescHandler::new(Dataver::new_rand(
                    rs_matter::utils::rand::sys_rand,
                )))),
            );
            for (cluster_id, def, concrete) in pe.clusters {
                cluster_defs.push(def);
                handler.insert(pe.id, cluster_id, concrete);
            }
            let device_types: &'static [DeviceType] = Box::leak(pe.device_types.into_boxed_slice());
            let cluster_defs: &'static [Cluster<'static>] = Box::leak(cluster_defs.into_boxed_slice());
            endpoints.push(Endpoint {
                id: pe.id,
                device_types,
                clusters: cluster_defs,
            });
        }

        let endpoints: &'static [Endpoint<'static>] = Box::leak(endpoints.into_boxed_slice());
        let node: &'static Node<'static> = Box::leak(Box::new(Node {
            id: self.node_id,
            endpoints,
        }));

        // TODO: derive real per-node commissioning data (discriminator,
        // passcode) once the pairing-file/persisted-seed plumbing produces
        // a `CommissioningData` value of rs-matter's own type; until then
        // every node commissions with rs-matter's built-in test credentials
        // and only the UDP port actually varies per node.
        let matter_cell: &'static mut core::mem::MaybeUninit<Matter> =
            Box::leak(Box::new(core::mem::MaybeUninit::uninit()));
        let matter: &'static Matter<'static> = matter_cell.init_with(Matter::init(
            &DEV_INFO,
            TEST_DEV_COMM,
            &TEST_DEV_ATT,
            rs_matter::utils::epoch::sys_epoch,
            rs_matter::utils::rand::sys_rand,
            self.seeds.port,
        ));

        matter.initialize_transport_buffers()?;

        let raw_socket = Socket::new(Domain::IPV6, Type::DGRAM, Some(Protocol::UDP))
            .map_err(|_| ErrorCode::StdIoError)?;
        raw_socket.set_reuse_address(true).map_err(|_| ErrorCode::StdIoError)?;
        raw_socket.set_only_v6(false).map_err(|_| ErrorCode::StdIoError)?;
        raw_socket.set_nonblocking(true).map_err(|_| ErrorCode::StdIoError)?;
        raw_socket
            .bind(&MATTER_SOCKET_BIND_ADDR.into())
            .map_err(|_| ErrorCode::StdIoError)?;
        let socket = async_io::Async::<UdpSocket>::new(raw_socket.into())
            .map_err(|_| ErrorCode::StdIoError)?;

        let fabrics_path = self.fabrics_path();
        let was_commissioned = Self::load_fabrics(matter, &fabrics_path);
        if was_commissioned {
            info!("node {}: already commissioned, skipping comm window", self.node_id);
        } else {
            const COMM_WINDOW_TIMEOUT_SECS: u16 = 900;
            matter.open_basic_comm_window(COMM_WINDOW_TIMEOUT_SECS)?;
            info!(
                "node {}: comm window open (discriminator={}, passcode={})",
                self.node_id, self.seeds.discriminator, self.seeds.passcode
            );
            if let Err(e) = matter.print_standard_qr_text(DiscoveryCapabilities::IP) {
                error!("failed to print QR text: {:?}", e);
            }
            if let Err(e) = matter.print_standard_qr_code(QrTextType::Unicode, DiscoveryCapabilities::IP) {
                error!("failed to print QR code: {:?}", e);
            }
        }

        let buffers: &'static mut core::mem::MaybeUninit<PooledBuffers<10, NoopRawMutex, IMBuffer>> =
            Box::leak(Box::new(core::mem::MaybeUninit::uninit()));
        let buffers = buffers.init_with(PooledBuffers::init(0));
        let subscriptions: &'static mut core::mem::MaybeUninit<DefaultSubscriptions> =
            Box::leak(Box::new(core::mem::MaybeUninit::uninit()));
        let subscriptions = subscriptions.init_with(DefaultSubscriptions::init());

        let dm_handler = (
            *node,
            endpoints::with_eth(
                &(),
                get_netifs(),
                matter.rand(),
                endpoints::with_sys(
                    &false,
                    matter.rand(),
                    EmptyHandler.chain(EpClMatcher::new(None, None), Async(&*handler)),
                ),
            ),
        );
        let dm = DataModel::new(matter, buffers, subscriptions, dm_handler);
        let responder = DefaultResponder::new(&dm);

        let stop = self.stop.clone();
        let node_id = self.node_id;
        let subs_path = self.subscriptions_path();
        let handle = std::thread::Builder::new()
            .name(format!("matter-node-{node_id}"))
            .spawn(move || {
                let run = async {
                    let logging_socket = LoggingUdpSocket::new(&socket);
                    let mut transport = pin!(matter.run(&logging_socket, &logging_socket));
                    let dbus = rs_matter::utils::zbus::Connection::system()
                        .await
                        .map_err(|_| Error::from(ErrorCode::StdIoError))?;
                    let mut mdns_responder =
                        FilteredAvahiMdnsResponder::new(matter, get_interface_name());
                    let mut mdns = pin!(mdns_responder.run(&dbus));
                    let mut respond = pin!(responder.run::<4, 4>());
                    let mut dm_job = pin!(dm.run());
                    let subs_store = Arc::new(super::subscription_persistence::SubscriptionStore::new(subs_path));
                    let mut resume = pin!(super::subscription_persistence::run_subscription_resumption(subs_store));
                    let persist = async {
                        loop {
                            matter.wait_persist().await;
                            if matter.fabrics_changed() {
                                Self::save_fabrics(matter, &fabrics_path);
                            }
                            if stop.load(Ordering::SeqCst) {
                                break;
                            }
                        }
                        Ok::<(), Error>(())
                    };
                    let mut persist = pin!(persist);

                    select4(
                        &mut transport,
                        &mut mdns,
                        select(&mut respond, select(&mut dm_job, &mut resume).coalesce()).coalesce(),
                        &mut persist,
                    )
                    .coalesce()
                    .await
                };

                if let Err(e) = futures_lite::future::block_on(run) {
                    error!("matter node {} terminated: {:?}", node_id, e);
                }
            })
            .expect("failed to spawn Matter server node thread");

        *self.thread.lock().unwrap() = Some(handle);
        Ok(())
    }

    /// Default close timeout (§4.2/§5: "`.close()` must honor a
    /// caller-supplied timeout, default 30s").
    const DEFAULT_CLOSE_TIMEOUT: Duration = Duration::from_secs(30);

    /// Signal the node's run loop to stop and wait for its thread to exit,
    /// up to `timeout` (§4.7 cleanup). A timeout is logged and swallowed —
    /// the caller's cleanup sequence proceeds regardless.
    pub async fn close(&self) {
        self.close_with_timeout(Self::DEFAULT_CLOSE_TIMEOUT).await
    }

    async fn close_with_timeout(&self, timeout: Duration) {
        self.stop.store(true, Ordering::SeqCst);

        let Some(handle) = self.thread.lock().unwrap().take() else {
            return;
        };
        let node_id = self.node_id;

        match tokio::time::timeout(timeout, tokio::task::spawn_blocking(move || handle.join())).await {
            Ok(Ok(Ok(()))) => info!("matter node {node_id}: closed"),
            Ok(Ok(Err(e))) => error!("matter node {node_id}: thread panicked during close: {e:?}"),
            Ok(Err(e)) => error!("matter node {node_id}: join task failed: {e}"),
            Err(_) => {
                error!(
                    "{}",
                    crate::error::MatterError::ServerNodeCloseTimeout(node_id.to_string(), timeout)
                );
            }
        }
    }
}
