//! Constants used in the deploy scripts

use std::time::Duration;

/// The number of confirmations to wait for on the implementation deployment
/// before the proxy's constructor delegate-calls into it
pub const NUM_DEPLOY_CONFIRMATIONS: u64 = 1;

/// The interval at which the chain head is polled while awaiting confirmations
pub const CONFIRMATION_POLL_INTERVAL: Duration = Duration::from_secs(1);

/// The maximum number of head polls before giving up on confirmations
pub const MAX_CONFIRMATION_POLLS: usize = 120;

/// The maximum size of deployed contract code, in bytes.
///
/// This is specified in EIP170: https://eips.ethereum.org/EIPS/eip-170
pub const MAX_CONTRACT_CODE_SIZE: usize = 24_576;

/// The maximum size of contract creation code, in bytes.
///
/// This is specified in EIP3860: https://eips.ethereum.org/EIPS/eip-3860
pub const MAX_INITCODE_SIZE: usize = 2 * MAX_CONTRACT_CODE_SIZE;

/// The storage slot containing the proxy admin contract address in the upgradeable proxy.
///
/// This is specified in EIP1967: https://eips.ethereum.org/EIPS/eip-1967#admin-address
pub const PROXY_ADMIN_STORAGE_SLOT: &str =
    "0xb53127684a568b3173ae13b9f8a6016e243e63b6e8ee1178d6a717850b5d6103";

/// The storage slot containing the implementation address in the upgradeable proxy.
///
/// This is specified in EIP1967: https://eips.ethereum.org/EIPS/eip-1967#logic-contract-address
pub const PROXY_IMPLEMENTATION_STORAGE_SLOT: &str =
    "0x360894a13ba1a3210667c828492db98dca3e2076cc3735a920a3ca505d382bbc";

/// The number of bytes stored in a single storage slot
pub const NUM_BYTES_STORAGE_SLOT: usize = 32;

/// The number of bytes in an Ethereum address
pub const NUM_BYTES_ADDRESS: usize = 20;

/// The maximum length of text stored in a fixed-width identifier.
///
/// One byte is always left for the null terminator.
pub const MAX_IDENTIFIER_LEN: usize = 31;

/// The artifact name of the proxy admin contract
pub const PROXY_ADMIN_CONTRACT_NAME: &str = "ProxyAdmin";

/// The artifact name of the publisher registry contract
pub const PUBLISHER_REGISTRY_CONTRACT_NAME: &str = "PublisherRegistry";

/// The artifact name of the oracle implementation contract
pub const ORACLE_CONTRACT_NAME: &str = "Oracle";

/// The artifact name of the upgradeable proxy contract
pub const PROXY_CONTRACT_NAME: &str = "TransparentUpgradeableProxy";

/// The extension of a compilation artifact file
pub const ARTIFACT_EXTENSION: &str = "json";

/// The extension of the source directories artifacts are grouped under
pub const SOURCE_DIR_EXTENSION: &str = "sol";

/// The deployments key in the `deployments.json` file
pub const DEPLOYMENTS_KEY: &str = "deployments";

/// The proxy admin contract key in the `deployments.json` file
pub const PROXY_ADMIN_CONTRACT_KEY: &str = "proxy_admin_contract";

/// The publisher registry contract key in the `deployments.json` file
pub const PUBLISHER_REGISTRY_CONTRACT_KEY: &str = "publisher_registry_contract";

/// The oracle implementation contract key in the `deployments.json` file
pub const ORACLE_CONTRACT_KEY: &str = "oracle_contract";

/// The oracle proxy contract key in the `deployments.json` file
pub const ORACLE_PROXY_CONTRACT_KEY: &str = "oracle_proxy_contract";

/// The prefix of a secret reference in the networks file
pub const SECRET_REF_PREFIX: &str = "${";

/// The suffix of a secret reference in the networks file
pub const SECRET_REF_SUFFIX: &str = "}";
