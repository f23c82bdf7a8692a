//! Read-only contract interfaces used for probing and classification

use alloy_sol_types::sol;

sol! {
    interface IERC165 {
        function supportsInterface(bytes4 interfaceId) external view returns (bool);
    }

    interface IERC725Y {
        function getData(bytes32 dataKey) external view returns (bytes memory dataValue);
    }

    /// ERC20 methods, also implemented by LSP7 (decimals, balanceOf, totalSupply)
    interface IERC20 {
        function name() external view returns (string memory);
        function symbol() external view returns (string memory);
        function decimals() external view returns (uint8);
        function totalSupply() external view returns (uint256);
        function balanceOf(address owner) external view returns (uint256);
        function allowance(address owner, address spender) external view returns (uint256);
    }

    interface IERC777 {
        function granularity() external view returns (uint256);
    }
}
